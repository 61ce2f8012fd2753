pub mod backend;
pub mod battle_clock;
pub mod geolocation;
pub mod leaderboard_feed;
pub mod preferences;
pub mod ranking;
pub mod tap_batch;

#[cfg(test)]
pub mod test_server;
