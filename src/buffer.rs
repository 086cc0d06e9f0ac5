//! Page-aligned working buffer owned by a single measurement.
use crate::error::ProbeError;
use crate::{ELEMENT_SIZE, Element};
use std::alloc::{self, Layout};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::slice;

/// Zero-initialized array of `Element`s whose first byte sits on a page boundary.
///
/// Memory is returned to the allocator on drop, so a buffer never outlives the
/// (length, stride) pair it was allocated for.
pub struct AlignedBuffer {
    ptr: NonNull<Element>,
    len: usize,
    layout: Layout,
}

impl AlignedBuffer {
    /// Allocate `len` elements aligned to `align` bytes (normally the page size)
    pub fn zeroed(len: usize, align: usize) -> Result<Self, ProbeError> {
        let bytes = len.checked_mul(ELEMENT_SIZE).ok_or(ProbeError::Layout {
            bytes: usize::MAX,
            align,
        })?;
        if bytes == 0 || align < std::mem::align_of::<Element>() {
            return Err(ProbeError::Layout { bytes, align });
        }
        let layout =
            Layout::from_size_align(bytes, align).map_err(|_| ProbeError::Layout { bytes, align })?;

        // SAFETY: layout has a non-zero size, checked above
        let raw = unsafe { alloc::alloc_zeroed(layout) } as *mut Element;
        let ptr = NonNull::new(raw).ok_or(ProbeError::Allocation { bytes, align })?;

        Ok(AlignedBuffer { ptr, len, layout })
    }

    /// Size of the allocation in bytes
    pub fn byte_len(&self) -> usize {
        self.layout.size()
    }

    /// Alignment the buffer was allocated with
    pub fn align(&self) -> usize {
        self.layout.align()
    }
}

impl Deref for AlignedBuffer {
    type Target = [Element];

    fn deref(&self) -> &[Element] {
        // SAFETY: ptr points to `len` initialized elements owned by self
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for AlignedBuffer {
    fn deref_mut(&mut self) -> &mut [Element] {
        // SAFETY: as above, and &mut self guarantees exclusive access
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        // SAFETY: ptr was returned by alloc_zeroed with this exact layout
        unsafe { alloc::dealloc(self.ptr.as_ptr() as *mut u8, self.layout) };
    }
}
