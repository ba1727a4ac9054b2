use super::*;

mod debounce;
mod model;
mod svg;
