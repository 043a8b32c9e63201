pub mod args;
pub mod copy_tree;
pub mod event;
pub mod execute;
pub mod ignore;
pub mod manifest;
pub mod ordered_map;
pub mod resolve;
pub mod result_error;
pub mod run;
pub mod shortcut;
pub mod validate;

macro_rules! function_path {
    () => {
        concat!(module_path!(), "::", function_name!(), " ", file!(), ":", line!())
    };
}

pub(crate) use function_path;
