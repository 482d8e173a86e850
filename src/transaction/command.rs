/// A reversible operation on a target `T`.
///
/// Commands capture whatever they need to revert at construction time.
/// A command that finds it would change nothing reports `is_valid() ==
/// false` and must not be pushed.
pub trait UndoCommand<T: ?Sized> {
    fn redo(&mut self, target: &mut T);
    fn undo(&mut self, target: &mut T);
    /// Short label for menus and history lists
    fn text(&self) -> String;
    fn is_valid(&self) -> bool {
        true
    }
}
