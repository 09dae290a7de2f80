pub(crate) mod beats;
pub(crate) mod controller;
pub(crate) mod frame_loop;
pub(crate) mod view;
