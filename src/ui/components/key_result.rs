/// Generic result type for component key handling.
///
/// Components consume keys and surface what the parent view must act on
/// through one shared shape instead of a result enum per component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Consumed, nothing for the parent to do.
  Handled,
  /// Consumed, and produced an event the parent handles.
  Event(T),
  /// Not this component's key; the parent tries its own bindings.
  NotHandled,
}
