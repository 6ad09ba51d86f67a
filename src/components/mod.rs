pub mod chat_panel;
pub mod controls;
pub mod graph_canvas;
pub mod header;
pub mod legend;
pub mod repo_input;
pub mod toast;
