use std::sync::OnceLock;

static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

/// Returns the page size of the system.
pub fn page_size() -> usize {
    *PAGE_SIZE.get_or_init(|| {
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size <= 0 {
            4096
        } else {
            size as usize
        }
    })
}

/// Rounds `size` up to a multiple of the page size. Returns `None` if the result does not fit in `usize`.
pub fn round_to_page(size: usize) -> Option<usize> {
    let page = page_size();
    size.div_ceil(page).checked_mul(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_page() {
        let page = page_size();
        assert!(page.is_power_of_two());
        assert_eq!(round_to_page(0), Some(0));
        assert_eq!(round_to_page(1), Some(page));
        assert_eq!(round_to_page(page), Some(page));
        assert_eq!(round_to_page(page + 1), Some(2 * page));
    }

    #[test]
    fn test_round_to_page_overflow() {
        let page = page_size();
        assert_eq!(round_to_page(usize::MAX), None);
        assert_eq!(round_to_page(usize::MAX - 100), None);
        assert_eq!(round_to_page(usize::MAX - page + 1), Some(usize::MAX - page + 1));
    }
}
