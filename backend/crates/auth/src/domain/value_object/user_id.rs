use kernel::id::Id;

#[derive(Debug, Clone, Copy)]
pub struct UserMarker;
pub type UserId = Id<UserMarker>;
