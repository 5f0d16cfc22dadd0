mod helpers;
mod launcher;
mod monitor;
