pub mod windowed_mode;
