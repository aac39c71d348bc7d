//! Host-provided native functions, registered into a `Session` before its
//! first `run`. `clock` lives here rather than in `glitter-eval` per spec
//! §1/§3/§6: it is an external collaborator of the core, not part of it.

use std::time::{SystemTime, UNIX_EPOCH};

use glitter::Session;
use glitter_eval::Value;

pub fn register_natives(session: &mut Session) {
    session.register_native("clock", 0, |_, _| {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        Ok(Value::Number(secs))
    });
}
