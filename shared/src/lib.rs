pub mod models;
pub mod utils;

// Plain data shared between the engine and whatever service layer sits on top of it.
// No indicator math lives here.
