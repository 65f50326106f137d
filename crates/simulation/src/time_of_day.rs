use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::TimeConfig;

/// Coarse period of the day, used by the presentation layer for lighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Night,
    Morning,
    Day,
    Evening,
}

/// Turns wall-clock time into whole simulation ticks.
///
/// One tick is one in-game minute at the default 60 ticks per hour. Real time
/// is accumulated in milliseconds and consumed one `tick_interval` at a time so
/// fractional frames never drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeManager {
    pub current_hour: u32,
    pub current_day: u32,
    pub current_tick: u32,
    pub total_ticks: u64,
    pub ticks_per_hour: u32,
    /// Milliseconds of real time per tick.
    pub tick_interval: f64,
    pub delta_accumulator: f64,
    #[serde(default)]
    pub paused: bool,
    #[serde(default = "default_base_interval")]
    pub base_interval: f64,
    #[serde(default = "default_min_interval")]
    pub min_interval: f64,
    #[serde(default = "default_max_interval")]
    pub max_interval: f64,
}

fn default_base_interval() -> f64 {
    TimeConfig::default().tick_interval_ms
}

fn default_min_interval() -> f64 {
    TimeConfig::default().min_tick_interval_ms
}

fn default_max_interval() -> f64 {
    TimeConfig::default().max_tick_interval_ms
}

impl Default for TimeManager {
    fn default() -> Self {
        Self::new(&TimeConfig::default())
    }
}

impl TimeManager {
    pub fn new(config: &TimeConfig) -> Self {
        Self {
            current_hour: config.start_hour % 24,
            current_day: 0,
            current_tick: 0,
            total_ticks: 0,
            ticks_per_hour: config.ticks_per_hour.max(1),
            tick_interval: config.tick_interval_ms,
            delta_accumulator: 0.0,
            paused: false,
            base_interval: config.tick_interval_ms,
            min_interval: config.min_tick_interval_ms,
            max_interval: config.max_tick_interval_ms,
        }
    }

    /// Add real elapsed time and return how many ticks are now due.
    ///
    /// Paused clocks swallow the delta entirely.
    pub fn accumulate(&mut self, delta: Duration) -> u32 {
        if self.paused || self.tick_interval <= 0.0 {
            return 0;
        }
        self.delta_accumulator += delta.as_secs_f64() * 1000.0;
        let mut due = 0;
        while self.delta_accumulator >= self.tick_interval {
            self.delta_accumulator -= self.tick_interval;
            due += 1;
        }
        due
    }

    /// Advance one tick, carrying into the hour and the day.
    pub fn tick(&mut self) {
        self.current_tick += 1;
        self.total_ticks += 1;
        if self.current_tick >= self.ticks_per_hour {
            self.current_tick = 0;
            self.current_hour += 1;
            if self.current_hour >= 24 {
                self.current_hour = 0;
                self.current_day += 1;
            }
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.delta_accumulator = 0.0;
    }

    pub fn speed_up(&mut self) {
        self.tick_interval = (self.tick_interval / 2.0).max(self.min_interval);
    }

    pub fn slow_down(&mut self) {
        self.tick_interval = (self.tick_interval * 2.0).min(self.max_interval);
    }

    pub fn normal_speed(&mut self) {
        self.tick_interval = self.base_interval;
    }

    /// Hour with the minutes folded in, e.g. 8.5 at half past eight.
    pub fn fractional_hour(&self) -> f32 {
        self.current_hour as f32 + self.current_tick as f32 / self.ticks_per_hour as f32
    }

    pub fn minute(&self) -> u32 {
        let per_hour = u64::from(self.ticks_per_hour.max(1));
        (u64::from(self.current_tick) * 60 / per_hour) as u32
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        match self.current_hour {
            0..=5 => TimeOfDay::Night,
            6..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Day,
            _ => TimeOfDay::Evening,
        }
    }

    pub fn is_working_hours(&self) -> bool {
        (9..17).contains(&self.current_hour)
    }

    pub fn is_sleeping_hours(&self) -> bool {
        self.current_hour >= 22 || self.current_hour < 6
    }

    /// 12-hour clock, e.g. `"8:05 AM"`.
    pub fn time_string(&self) -> String {
        let suffix = if self.current_hour < 12 { "AM" } else { "PM" };
        let hour = match self.current_hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:{:02} {}", hour, self.minute(), suffix)
    }

    /// True on the first tick of `hour` on every `period_days`-th day.
    pub fn is_periodic_moment(&self, period_days: u32, hour: u32) -> bool {
        period_days > 0
            && self.current_day % period_days == 0
            && self.current_hour == hour
            && self.current_tick == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_eight() {
        let time = TimeManager::default();
        assert_eq!(time.current_hour, 8);
        assert_eq!(time.current_day, 0);
        assert_eq!(time.time_string(), "8:00 AM");
    }

    #[test]
    fn test_tick_carries_into_hour_and_day() {
        let mut time = TimeManager::default();
        for _ in 0..60 {
            time.tick();
        }
        assert_eq!(time.current_hour, 9);
        assert_eq!(time.current_tick, 0);

        for _ in 0..(15 * 60) {
            time.tick();
        }
        assert_eq!(time.current_hour, 0);
        assert_eq!(time.current_day, 1);
        assert_eq!(time.total_ticks, 16 * 60);
    }

    #[test]
    fn test_accumulator_consumes_whole_intervals() {
        let mut time = TimeManager::default();
        assert_eq!(time.accumulate(Duration::from_millis(2500)), 2);
        assert!((time.delta_accumulator - 500.0).abs() < 1e-6);
        assert_eq!(time.accumulate(Duration::from_millis(500)), 1);
        assert!(time.delta_accumulator.abs() < 1e-6);
    }

    #[test]
    fn test_pause_swallows_time_and_resume_resets() {
        let mut time = TimeManager::default();
        time.accumulate(Duration::from_millis(700));
        time.pause();
        assert_eq!(time.accumulate(Duration::from_secs(10)), 0);
        time.resume();
        assert_eq!(time.delta_accumulator, 0.0);
        assert_eq!(time.accumulate(Duration::from_millis(999)), 0);
    }

    #[test]
    fn test_speed_bounds() {
        let mut time = TimeManager::default();
        for _ in 0..10 {
            time.speed_up();
        }
        assert_eq!(time.tick_interval, 100.0);
        for _ in 0..10 {
            time.slow_down();
        }
        assert_eq!(time.tick_interval, 5000.0);
        time.normal_speed();
        assert_eq!(time.tick_interval, 1000.0);
    }

    #[test]
    fn test_periods_of_day() {
        let mut time = TimeManager::default();
        time.current_hour = 3;
        assert_eq!(time.time_of_day(), TimeOfDay::Night);
        assert!(time.is_sleeping_hours());
        time.current_hour = 10;
        assert_eq!(time.time_of_day(), TimeOfDay::Morning);
        assert!(time.is_working_hours());
        time.current_hour = 12;
        assert_eq!(time.time_of_day(), TimeOfDay::Day);
        assert_eq!(time.time_string(), "12:00 PM");
        time.current_hour = 0;
        assert_eq!(time.time_string(), "12:00 AM");
        time.current_hour = 20;
        assert_eq!(time.time_of_day(), TimeOfDay::Evening);
        assert!(!time.is_working_hours());
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let value = serde_json::to_value(TimeManager::default()).expect("serializes");
        assert_eq!(value["currentHour"], 8);
        assert_eq!(value["ticksPerHour"], 60);
        assert!(value.get("deltaAccumulator").is_some());
    }
}
