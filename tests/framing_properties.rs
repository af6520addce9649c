//! Property tests for framing and bulk transfers over the mock link.

mod common;

use common::{delimited, port_with_input};
use proptest::prelude::*;
use serial_line::line::{read_line_bytes, LineIo};
use serial_line::port::{BaudRate, SerialPort};

const DELIM: u8 = b'\n';

// Payload bytes never include the delimiter.
fn line_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>().prop_filter("not the delimiter", |b| *b != DELIM), 0..40)
}

proptest! {
    #[test]
    fn successive_getlines_recover_every_line(lines in prop::collection::vec(line_strategy(), 1..8)) {
        let refs: Vec<&[u8]> = lines.iter().map(Vec::as_slice).collect();
        let (mut port, link) = port_with_input(&delimited(&refs, DELIM), 0);

        for expected in &lines {
            let mut line = Vec::new();
            port.getline(&mut line, usize::MAX, DELIM);
            prop_assert_eq!(&line, expected);
        }
        prop_assert_eq!(link.available_bytes(), 0);
    }

    #[test]
    fn getline_stops_at_length_bound(data in line_strategy(), max_len in 0usize..50) {
        let (mut port, link) = port_with_input(&data, 0);
        let mut line = Vec::new();

        port.getline(&mut line, max_len, DELIM);
        let taken = max_len.min(data.len());
        prop_assert_eq!(&line[..], &data[..taken]);
        prop_assert_eq!(link.available_bytes(), data.len() - taken);
    }

    #[test]
    fn ignore_consumes_through_delimiter(skipped in line_strategy(), rest in line_strategy()) {
        let (mut port, link) = port_with_input(&delimited(&[skipped.as_slice(), rest.as_slice()], DELIM), 0);

        port.ignore(usize::MAX, DELIM);
        prop_assert_eq!(link.available_bytes(), rest.len() + 1);
    }

    #[test]
    fn read_line_is_bounded_by_read_chunk(data in line_strategy(), chunk in 1usize..16) {
        let (mut port, _link) = port_with_input(&data, chunk);
        let line = read_line_bytes(&mut port, DELIM);
        prop_assert_eq!(line.len(), chunk.min(data.len()));
    }

    #[test]
    fn bulk_read_takes_what_is_queued(
        queued in prop::collection::vec(any::<u8>(), 1..64),
        capacity in 1usize..64,
    ) {
        let (mut port, _link) = port_with_input(&queued, 0);
        let mut buffer = vec![0u8; capacity];

        let n = port.read(&mut buffer, Some(capacity)).unwrap();
        prop_assert_eq!(n, queued.len().min(capacity));
        prop_assert_eq!(&buffer[..n], &queued[..n]);
        prop_assert!(port.good());
    }

    #[test]
    fn only_standard_baud_rates_convert(value in any::<u32>()) {
        let standard = BaudRate::ALL.iter().any(|b| b.as_u32() == value);
        prop_assert_eq!(BaudRate::try_from(value).is_ok(), standard);
    }
}
