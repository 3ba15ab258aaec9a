use core::net::Ipv4Addr;

use rand::{Rng, SeedableRng};

use ipv4_packet::{Flag, Ipv4Packet, Ipv4RawPacket};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn random_packets_round_trip() {
    init_logging();
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x4950_7634);

    for _ in 0..100 {
        let mut p = Ipv4RawPacket::new();
        p.set_dscp(rng.gen_range(0..64)).unwrap();
        p.set_ecn(rng.gen_range(0..4)).unwrap();
        p.set_identification(rng.gen());
        p.set_flags(rng.gen_range(0..8)).unwrap();
        p.set_fragment_offset(rng.gen_range(0..8192)).unwrap();
        p.set_time_to_live(rng.gen());
        p.set_protocol(rng.gen());
        p.set_src_addr(Ipv4Addr::from(rng.gen::<u32>()));
        p.set_dst_addr(Ipv4Addr::from(rng.gen::<u32>()));

        let payload_len = rng.gen_range(0..512);
        let payload: Vec<u8> = (0..payload_len).map(|_| rng.gen()).collect();
        p.set_payload(payload).unwrap();

        p.set_header_checksum(p.generate_header_checksum());

        let bytes = p.to_bytes();
        assert_eq!(bytes.len(), 20 + payload_len);

        let parsed = Ipv4RawPacket::parse(&bytes).unwrap();
        assert_eq!(parsed, p);
        assert!(parsed.verify_checksum());
    }
}

#[test]
fn corrupted_bytes_fail_verification() {
    init_logging();
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x64_6674);

    let mut p = Ipv4Packet::new();
    p.set_protocol("TCP").unwrap();
    p.set_flags([Flag::DontFragment]).unwrap();
    p.set_time_to_live(64);
    p.set_src_addr(Ipv4Addr::new(10, 0, 0, 1));
    p.set_dst_addr(Ipv4Addr::new(10, 0, 0, 2));
    p.set_header_checksum(p.generate_header_checksum());
    assert!(p.verify_checksum());

    let bytes = p.to_bytes();
    for _ in 0..50 {
        let mut corrupted = bytes.clone();
        let byte = rng.gen_range(0..20);
        let bit = 1u8 << rng.gen_range(0..8);
        corrupted[byte] ^= bit;

        let parsed = Ipv4Packet::parse(&corrupted).unwrap();
        assert!(
            !parsed.verify_checksum(),
            "flipped bit {bit:#010b} in byte {byte} went undetected"
        );
    }
}

#[test]
fn semantic_views_survive_the_wire() {
    init_logging();

    let mut p = Ipv4Packet::new();
    p.set_protocol("UDP").unwrap();
    p.set_flags([Flag::DontFragment, Flag::MoreFragments]).unwrap();
    p.set_payload(b"hello".to_vec()).unwrap();

    let parsed = Ipv4Packet::parse(&p.to_bytes()).unwrap();
    assert_eq!(parsed.protocol(), Ok("UDP"));
    assert_eq!(
        parsed.flags().unwrap(),
        [Flag::DontFragment, Flag::MoreFragments].into_iter().collect()
    );
    assert_eq!(parsed.payload(), b"hello");
}
