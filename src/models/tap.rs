use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "count", rename_all = "snake_case")]
pub enum BatchState {
    Idle,
    Accumulating(u32),
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TapStats {
    pub batch: BatchState,
    pub pending_taps: u32,
    pub session_taps: u64,
    pub total_taps: u64,
}

#[derive(Debug, Serialize)]
pub struct TapResult {
    #[serde(flatten)]
    pub stats: TapStats,
    pub submitted: bool,
}
