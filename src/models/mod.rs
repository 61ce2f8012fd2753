pub mod battle;
pub mod country;
pub mod leaderboard;
pub mod tap;
