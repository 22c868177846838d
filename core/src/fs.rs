/// Backing storage for asset files.
///
/// Desktop builds wrap `std::fs::File`; device builds sit on whatever block
/// device the platform provides. `size` reports the full length of the file
/// so loaders can verify layout before reading the payload.
pub trait File: embedded_io::Read + embedded_io::Write + embedded_io::Seek {
    fn size(&self) -> usize;
}
