/*
 *  Crafter, a referee for user-defined chess variants.
 *  Copyright (C) 2024 ToTheAnd
 *
 *  Crafter is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  Crafter is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with Crafter. If not, see <https://www.gnu.org/licenses/>.
 */
use crate::general::common::{parse_int_from_str, Res, Side, NUM_SIDES};
use anyhow::{anyhow, bail};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::{Duration, Instant};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[must_use]
pub struct TimeControl {
    pub remaining: Duration,
    pub increment: Duration,
}

impl Default for TimeControl {
    fn default() -> Self {
        Self::infinite()
    }
}

impl Display for TimeControl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_infinite() {
            write!(f, "infinite")
        } else {
            write!(f, "{0}ms + {1}ms", self.remaining.as_millis(), self.increment.as_millis())
        }
    }
}

impl FromStr for TimeControl {
    type Err = anyhow::Error;

    /// `infinite`, or `<seconds>[+<increment seconds>]`, e.g. `300+2`.
    fn from_str(s: &str) -> Res<Self> {
        let s = s.trim();
        if s == "infinite" || s == "∞" {
            return Ok(TimeControl::infinite());
        }
        let mut parts = s.split('+');
        let seconds = |part: Option<&str>, name: &str| -> Res<Duration> {
            let Some(part) = part else { return Ok(Duration::ZERO) };
            let value: f64 = parse_int_from_str(part.trim(), name)?;
            if !value.is_finite() || value < 0.0 {
                bail!("The {name} must be a non-negative number of seconds, not {value}");
            }
            Duration::try_from_secs_f64(value).map_err(|err| anyhow!("The {name} of {value} seconds is too large: {err}"))
        };
        let remaining = seconds(parts.next(), "start time")?;
        let increment = seconds(parts.next(), "increment")?;
        if parts.next().is_some() {
            bail!("Time controls look like '300+2', not '{s}'");
        }
        Ok(TimeControl { remaining, increment })
    }
}

impl TimeControl {
    pub fn infinite() -> Self {
        TimeControl { remaining: Duration::MAX, increment: Duration::ZERO }
    }

    pub fn new(remaining: Duration, increment: Duration) -> Self {
        TimeControl { remaining, increment }
    }

    pub fn is_infinite(&self) -> bool {
        self.remaining >= Duration::MAX / 2
    }
}

/// Per-side remaining time. The clock only keeps time; deciding that time ran out is up to the caller,
/// who reports it through [`GameEngine::on_time_expired`](crate::engine::GameEngine::on_time_expired).
#[derive(Debug, Clone)]
#[must_use]
pub struct GameClock {
    controls: [TimeControl; NUM_SIDES],
    turn_start: Instant,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(TimeControl::infinite(), TimeControl::infinite())
    }
}

impl GameClock {
    pub fn new(white: TimeControl, black: TimeControl) -> Self {
        Self { controls: [white, black], turn_start: Instant::now() }
    }

    pub fn time_control(&self, side: Side) -> TimeControl {
        self.controls[side.idx()]
    }

    pub fn elapsed(&self) -> Duration {
        self.turn_start.elapsed()
    }

    /// The remaining time of `side`, minus the running turn if `side` is to move.
    pub fn remaining(&self, side: Side, to_move: Option<Side>) -> Duration {
        let remaining = self.controls[side.idx()].remaining;
        if to_move == Some(side) {
            remaining.saturating_sub(self.elapsed())
        } else {
            remaining
        }
    }

    /// Ends the turn of `side`: deducts the time spent on it, adds the increment and starts the next turn.
    pub fn charge(&mut self, side: Side) {
        let now = Instant::now();
        self.charge_duration(side, now.duration_since(self.turn_start));
        self.turn_start = now;
    }

    fn charge_duration(&mut self, side: Side, spent: Duration) {
        let control = &mut self.controls[side.idx()];
        if control.is_infinite() {
            return;
        }
        control.remaining = control.remaining.saturating_sub(spent).saturating_add(control.increment);
    }

    pub fn restart_turn(&mut self) {
        self.turn_start = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_time_control_test() {
        let tc = TimeControl::from_str("60+1").unwrap();
        assert_eq!(tc, TimeControl::new(Duration::from_secs(60), Duration::from_secs(1)));
        assert_eq!(tc.to_string(), "60000ms + 1000ms");
        let tc = TimeControl::from_str("0.5").unwrap();
        assert_eq!(tc.remaining, Duration::from_millis(500));
        assert_eq!(tc.increment, Duration::ZERO);
        assert!(TimeControl::from_str("infinite").unwrap().is_infinite());
        assert_eq!(TimeControl::default().to_string(), "infinite");
        assert!(TimeControl::from_str("-3").is_err());
        assert!(TimeControl::from_str("1+2+3").is_err());
        assert!(TimeControl::from_str("soon").is_err());
    }

    #[test]
    fn huge_time_control_test() {
        let err = TimeControl::from_str("1e30").unwrap_err();
        assert!(err.to_string().contains("too large"), "{err}");
        assert!(TimeControl::from_str("5+1e30").is_err());
        assert!(TimeControl::from_str("inf").is_err());
        let tc = TimeControl::from_str("1e6").unwrap();
        assert_eq!(tc.remaining, Duration::from_secs(1_000_000));
    }

    #[test]
    fn charge_test() {
        let tc = TimeControl::new(Duration::from_secs(10), Duration::from_secs(2));
        let mut clock = GameClock::new(tc, TimeControl::infinite());
        clock.charge_duration(Side::White, Duration::from_secs(3));
        assert_eq!(clock.time_control(Side::White).remaining, Duration::from_secs(9));
        clock.charge_duration(Side::White, Duration::from_secs(30));
        assert_eq!(clock.time_control(Side::White).remaining, Duration::from_secs(2));
        clock.charge_duration(Side::Black, Duration::from_secs(30));
        assert!(clock.time_control(Side::Black).is_infinite());
        assert!(clock.remaining(Side::White, Some(Side::White)) <= Duration::from_secs(2));
        assert_eq!(clock.remaining(Side::White, None), Duration::from_secs(2));
    }
}
