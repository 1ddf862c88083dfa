/// Perform binary search on the given range. It requires a value function
/// and a unary comparison function that tells if the generated value compares
/// to the serach's output.
pub fn binary_search_fn<T, FVal, FCmp>(
    (mut left, mut right): (usize, usize),
    mut fun: FVal,
    mut cmp: FCmp
) -> T
    where
        FVal: FnMut(usize) -> T,
        FCmp: FnMut(&T) -> std::cmp::Ordering,
{
    use std::cmp::Ordering::*;

    assert!(left <= right);

    loop {
        let mid = left + (right - left) / 2;
        let mid_value = fun(mid);

        match cmp(&mid_value) {
            Less => { left = mid + 1; },
            Equal => { return mid_value; },
            Greater => { right = mid; },
        }

        if left >= right {
            return mid_value;
        }
    }
}
