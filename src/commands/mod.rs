pub mod admin;
pub mod leaderboard;
pub mod levelup;
pub mod links;
