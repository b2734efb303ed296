mod nv12_to_argb;

pub(crate) use nv12_to_argb::Nv12ToArgb;
