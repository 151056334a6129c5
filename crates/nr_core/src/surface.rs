use crate::view::ListingView;
use crate::Result;

/// Something that can show a [`ListingView`] to the user.
pub trait DisplaySurface {
    fn render(&mut self, view: &ListingView) -> Result<()>;
}
