//! Item commands: list, show, add, edit, delete and photos

pub mod handler;

pub use handler::{
    handle_add_command, handle_clear_command, handle_delete_command, handle_edit_command, handle_list_command,
    handle_photo_command, handle_show_command,
};
