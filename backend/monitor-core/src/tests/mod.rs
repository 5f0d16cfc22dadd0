mod monitor;
mod protocol;
mod support;
