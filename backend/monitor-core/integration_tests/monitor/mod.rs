mod client;
mod lifecycle;
