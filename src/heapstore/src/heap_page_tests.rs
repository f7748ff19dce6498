#[cfg(test)]
mod tests {
    use crate::heap_page::{blank_slot, encode_slot, PageHeader};
    use common::{HEADER_WIDTH, SLOTS_PER_PAGE, SLOT_WIDTH};

    #[test]
    fn test_fresh_header_layout() {
        let header = PageHeader::new_empty(1);
        let encoded = header.encode();
        assert_eq!(encoded.len(), HEADER_WIDTH);
        assert_eq!(
            encoded.trim_end(),
            "PAGE:1,Empty:1-2-3-4-5-6-7-8-9-10,Records:0"
        );
    }

    #[test]
    fn test_header_round_trip() {
        let mut header = PageHeader::new_empty(2);
        for _ in 0..4 {
            header.take_free_slot().unwrap();
        }
        header.put_free_slot(2).unwrap();
        let parsed = PageHeader::parse(&header.encode()).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.records, 3);
        assert_eq!(parsed.free_slots, vec![2, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_full_page_encodes_empty_list() {
        let mut header = PageHeader::new_empty(3);
        while header.take_free_slot().is_some() {}
        assert!(!header.has_space());
        let encoded = header.encode();
        assert_eq!(encoded.trim_end(), "PAGE:3,Empty:,Records:10");

        // The single empty token must come back as the empty list, not [""].
        let parsed = PageHeader::parse(&encoded).unwrap();
        assert!(parsed.free_slots.is_empty());
        assert_eq!(parsed.records, SLOTS_PER_PAGE as u16);
    }

    #[test]
    fn test_take_and_put_keep_invariant() {
        let mut header = PageHeader::new_empty(1);
        assert_eq!(header.take_free_slot(), Some(1));
        assert_eq!(header.take_free_slot(), Some(2));
        assert_eq!(header.take_free_slot(), Some(3));
        header.check().unwrap();

        // Free out of order; the list must stay strictly ascending.
        header.put_free_slot(3).unwrap();
        header.put_free_slot(1).unwrap();
        assert_eq!(header.free_slots, vec![1, 3, 4, 5, 6, 7, 8, 9, 10]);
        header.check().unwrap();

        // Double free is a storage error.
        assert!(header.put_free_slot(3).is_err());
    }

    #[test]
    fn test_parse_rejects_corrupt_headers() {
        assert!(PageHeader::parse("PAGE:1,Empty:1-2,Records:9").is_err()); // 2 + 9 != 10
        assert!(PageHeader::parse("PAGE:1,Empty:2-1-3-4-5-6-7-8-9-10,Records:0").is_err());
        assert!(PageHeader::parse("PAGE:x,Empty:,Records:10").is_err());
        assert!(PageHeader::parse("Empty:,Records:10").is_err());
        assert!(PageHeader::parse("PAGE:1,Empty:,Records:10,extra:1").is_err());
    }

    #[test]
    fn test_slot_encoding() {
        let body = encode_slot(4, "person alice 30 paris").unwrap();
        assert_eq!(body.len(), SLOT_WIDTH);
        assert_eq!(body.trim_end(), "4 person alice 30 paris");

        assert_eq!(blank_slot(), " ".repeat(SLOT_WIDTH));
    }

    #[test]
    fn test_slot_encoding_rejects_bad_payloads() {
        assert!(encode_slot(1, "a\nb").is_err());
        let oversized = "x".repeat(SLOT_WIDTH);
        assert!(encode_slot(1, &oversized).is_err());
        // Exactly at the boundary still fits: "1 " plus 238 bytes.
        let fits = "x".repeat(SLOT_WIDTH - 2);
        assert_eq!(encode_slot(1, &fits).unwrap().len(), SLOT_WIDTH);
    }
}
