// implemented by anything holding a channel subscription that must be dropped explicitly,
// since the listener closure keeps its owner alive
pub trait Destroyable {
    fn destroy(&mut self);
}
