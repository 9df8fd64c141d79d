pub mod game;
pub mod participants;
pub mod rankings;
