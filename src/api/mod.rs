// Remote API client modules

pub mod counter;
