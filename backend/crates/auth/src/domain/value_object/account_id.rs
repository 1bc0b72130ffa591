use kernel::id::{Id, markers};

pub type AccountId = Id<markers::Account>;
pub type ProfileId = Id<markers::Profile>;
