mod dispatch;
mod readiness;
mod session;
