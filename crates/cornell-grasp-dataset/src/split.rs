use crate::DatasetError;

/// Image-wise train/test split for k-fold cross validation.
///
/// Unique ids are sorted and cut into `k` contiguous folds whose sizes differ
/// by at most one; fold `fold` is returned as the test set and the rest as the
/// training set, both sorted.
pub fn kfold_split<T: Ord + Clone>(
    ids: &[T],
    k: usize,
    fold: usize,
) -> Result<(Vec<T>, Vec<T>), DatasetError> {
    if k == 0 || fold >= k {
        return Err(DatasetError::InvalidConfig(format!(
            "fold {fold} out of range for k = {k}"
        )));
    }
    let mut unique = ids.to_vec();
    unique.sort();
    unique.dedup();

    let n = unique.len();
    let start = fold * n / k;
    let end = (fold + 1) * n / k;

    let test = unique[start..end].to_vec();
    let train = unique[..start]
        .iter()
        .chain(&unique[end..])
        .cloned()
        .collect();
    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_partition_the_ids() {
        let ids: Vec<u32> = vec![5, 3, 1, 2, 4, 3, 6, 7, 8, 9];
        let mut seen = Vec::new();
        for fold in 0..3 {
            let (train, test) = kfold_split(&ids, 3, fold).unwrap();
            assert_eq!(train.len() + test.len(), 9);
            assert!(test.iter().all(|id| !train.contains(id)));
            seen.extend(test);
        }
        seen.sort();
        assert_eq!(seen, (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn folds_are_contiguous() {
        let ids = ["0100", "0101", "0102", "0103"];
        let (train, test) = kfold_split(&ids, 2, 1).unwrap();
        assert_eq!(test, vec!["0102", "0103"]);
        assert_eq!(train, vec!["0100", "0101"]);
    }

    #[test]
    fn rejects_bad_fold() {
        assert!(kfold_split(&[1, 2, 3], 3, 3).is_err());
        assert!(kfold_split(&[1, 2, 3], 0, 0).is_err());
    }
}
