pub mod chart_view;
pub mod moon_panel;
