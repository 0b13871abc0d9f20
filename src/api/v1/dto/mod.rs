pub mod pings;
