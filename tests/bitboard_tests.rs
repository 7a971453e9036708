use broadside::{BitBoard, BitBoardError, CellSet, Coord};

#[test]
fn test_insert_contains_len() {
    let mut bb = BitBoard::<u16, 4>::new();
    assert!(bb.is_empty());

    assert_eq!(bb.insert(Coord::new(1, 1)), Ok(true));
    assert!(bb.contains(Coord::new(1, 1)));
    // second insert reports the cell as already present
    assert_eq!(bb.insert(Coord::new(1, 1)), Ok(false));
    assert_eq!(bb.len(), 1);

    assert!(!bb.contains(Coord::new(4, 0)));
    assert_eq!(
        bb.insert(Coord::new(4, 0)),
        Err(BitBoardError::IndexOutOfBounds { row: 4, col: 0 })
    );
}

#[test]
fn test_iter_row_major() {
    let mut bb = BitBoard::<u16, 4>::new();
    bb.insert(Coord::new(3, 3)).unwrap();
    bb.insert(Coord::new(0, 1)).unwrap();
    let cells: Vec<_> = bb.iter().collect();
    assert_eq!(cells, vec![Coord::new(0, 1), Coord::new(3, 3)]);
}

#[test]
fn test_complement_stays_on_grid() {
    let mut set = CellSet::new();
    set.insert(Coord::new(0, 0)).unwrap();
    let rest = !set;
    assert_eq!(rest.len(), 99);
    assert!(!rest.contains(Coord::new(0, 0)));
    assert!((rest | set).is_full());
    assert!((rest & set).is_empty());
}
