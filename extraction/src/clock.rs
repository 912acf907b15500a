use std::fmt::Debug;

use chrono::prelude::*;

pub type Timestamp = DateTime<Local>;

pub trait Clock: Debug {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Default)]
pub struct RealClock;

impl RealClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for RealClock {
    fn now(&self) -> Timestamp {
        Local::now()
    }
}

/// Returns a file name of the form `{prefix}_{YYYYmmdd_HHMMSS}.{extension}`.
pub fn stamped_file_name(prefix: &str, at: Timestamp, extension: &str) -> String {
    format!("{}_{}.{}", prefix, at.format("%Y%m%d_%H%M%S"), extension)
}

#[cfg(test)]
pub use fake::*;


#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use googletest::prelude::*;

    use super::*;

    #[gtest]
    fn test_stamped_file_name() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();

        expect_eq!(stamped_file_name("br", at, "csv"), "br_20240309_070501.csv");
    }

    #[gtest]
    fn test_fake_clock_advances_shared_time() {
        let start = Local.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap();
        let mut clock = FakeClock::new(start);
        let observer = clock.clone();

        clock.advance(TimeDelta::seconds(1));

        expect_eq!(
            stamped_file_name("br", observer.now(), "log"),
            "br_20240310_000000.log"
        );
    }
}
