use chrono::{DateTime, Utc};

// Mocking out time so that it is possible to run tests that depend on time.
pub trait ISys: Send + Sync {
    /// The current point in time
    fn now(&self) -> DateTime<Utc>;
}

/// System that gets the real time and is used when not testing
pub struct RealSys {}
impl ISys for RealSys {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// System that is frozen at a given point in time
pub struct StaticTimeSys(pub DateTime<Utc>);
impl ISys for StaticTimeSys {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
