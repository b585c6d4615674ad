/// Namespace prefix applied to constraint keys before a reservation is sent
/// to the botplane scheduler. Keeps slice constraints from colliding with the
/// scheduler's own reserved keys.
pub const CONSTRAINT_KEY_PREFIX: &str = "label:";
