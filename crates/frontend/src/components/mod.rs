pub mod context_menu;
pub mod detail_panel;
pub mod map_view;
pub mod memo_editor;
pub mod site_list;
pub mod toast;
pub mod toolbar;
