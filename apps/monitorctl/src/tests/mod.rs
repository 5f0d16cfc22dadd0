mod logger;
mod run;
