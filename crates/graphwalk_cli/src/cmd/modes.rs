use graphwalk::graph::OperationMode;

/// Print every operation mode name, one per line.
pub fn run() {
	for mode in OperationMode::ALL {
		println!("{mode}");
	}
}
