mod command_overlay;
mod confirm;
mod form;
mod input;
mod key_result;
mod picker;
mod search_input;

pub use command_overlay::draw_command_overlay;
pub use confirm::{ConfirmDialog, ConfirmEvent};
pub use form::{Form, FormEvent, FormField};
pub use input::TextInput;
pub use key_result::KeyResult;
pub use picker::{Picker, PickerEvent, PickerItem};
pub use search_input::{SearchEvent, SearchInput};
