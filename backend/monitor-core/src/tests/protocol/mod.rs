mod codec;
mod command;
