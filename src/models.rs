use crate::squares::PrizeSchedule;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub prize_schedule_path: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./squares.db".to_string());

        let prize_schedule_path = std::env::var("PRIZE_SCHEDULE_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            database_path,
            prize_schedule_path,
        })
    }

    /// Prize amounts from `PRIZE_SCHEDULE_PATH`, or the standard schedule
    /// when it isn't set
    pub fn prize_schedule(&self) -> anyhow::Result<PrizeSchedule> {
        PrizeSchedule::load_optional(self.prize_schedule_path.as_deref())
    }
}
