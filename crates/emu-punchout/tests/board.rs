//! Board-level tests driving Punch-Out!! through its CPU bus.

use arcade_video::{RomError, RomSet, ScreenUpdate};
use emu_core::{Bus, Observable, Value};
use emu_punchout::{NullSpeech, PunchOut, PunchOutConfig, SpeechSynth, Variant};

/// Erased (all ones) gfx ROMs, as the inverted boards store blank pixels,
/// except tile 1, which is pen 0 in every pixel.
fn roms() -> RomSet {
    fn inked_tile_1(size: usize, planes: usize) -> Vec<u8> {
        let mut rom = vec![0xFFu8; size];
        let stride = size / planes;
        for plane in 0..planes {
            rom[plane * stride + 8..][..8].fill(0);
        }
        rom
    }
    RomSet::new()
        .with("program", (0..0xC000).map(|i| (i & 0xFF) as u8).collect())
        .with("top chars", inked_tile_1(0x4000, 2))
        .with("bottom chars", inked_tile_1(0x4000, 2))
        .with("big sprite 1", inked_tile_1(0x30000, 3))
        .with("big sprite 2", inked_tile_1(0x10000, 2))
        .with("color prom", vec![0; 0xC00])
}

fn board_with(variant: Variant, speech: Box<dyn SpeechSynth>) -> PunchOut {
    PunchOut::new(
        PunchOutConfig::for_variant(variant),
        &roms(),
        Box::new([0xFFu8; 4]),
        speech,
    )
    .ok()
    .expect("rom set is complete")
}

fn board() -> PunchOut {
    board_with(Variant::PunchOut, Box::new(NullSpeech))
}

fn pixel(po: &PunchOut, x: i32, y: i32) -> u16 {
    po.frame().get(x, y).expect("inside frame")
}

#[test]
fn program_rom_is_mapped_at_zero() {
    let mut po = board();
    assert_eq!(po.read(0x0123).data, 0x23);
    po.write(0x0123, 0x00);
    assert_eq!(po.read(0x0123).data, 0x23);
    assert_eq!(po.read(0xC800).data, 0);
}

#[test]
fn top_tile_row_2_is_first_visible_row() {
    let mut po = board();
    // Cell (row 2, column 0) = tile 1, colour 0.
    po.write(0xD800 + 2 * 64, 0x01);
    po.render_frame(false);
    // Raw pen 0 maps through xor 3 to pen 3; erased tiles to pen 0.
    assert_eq!(pixel(&po, 0, 0), 3);
    assert_eq!(pixel(&po, 7, 7), 3);
    assert_eq!(pixel(&po, 8, 0), 0);
    assert_eq!(pixel(&po, 0, 8), 0);
}

#[test]
fn bottom_rows_follow_their_scroll_pair() {
    let mut po = board();
    po.write(0xF000 + 2 * 128, 0x01); // cell (row 2, column 0)
    // 58 + 0x1C6 = 512: scroll wraps back to column 0 for tile row 2.
    po.write(0xF004, 0xC6);
    po.write(0xF005, 0x01);
    po.render_frame(false);
    assert_eq!(pixel(&po, 0, 240), 515);
    assert_eq!(pixel(&po, 7, 247), 515);
    assert_eq!(pixel(&po, 8, 240), 512);
    // Tile row 3 keeps the default scroll.
    assert_eq!(pixel(&po, 0, 248), 512);
}

#[test]
fn big_sprite_2_lands_on_bottom_monitor() {
    let mut po = board();
    po.write(0xE800, 0x01); // cell 0 = tile 1
    // x: 512 - 457 - 55 = 0; y: 256 - 243 + 3 = 16 -> first visible row.
    for (reg, value) in [0xC9u8, 0x01, 243, 0x01, 0x00].into_iter().enumerate() {
        po.write(0xDFF8 + reg as u32, value);
    }
    po.render_frame(false);
    assert_eq!(pixel(&po, 0, 240), 515);
    assert_eq!(pixel(&po, 7, 247), 515);
    assert_ne!(pixel(&po, 8, 240), 515);
    assert_eq!(po.query("video.big2.control"), Some(Value::Bytes(vec![0xC9, 1, 243, 1, 0])));
}

#[test]
fn erased_big_sprite_2_pixels_show_the_tiles_behind() {
    let mut po = board();
    po.write(0xF000 + 2 * 128, 0x01); // bottom cell (row 2, column 0)
    po.write(0xF004, 0xC6);
    po.write(0xF005, 0x01);
    po.write(0xE800, 0x00); // big sprite cell 0 = erased tile 0
    for (reg, value) in [0xC9u8, 0x01, 243, 0x01, 0x00].into_iter().enumerate() {
        po.write(0xDFF8 + reg as u32, value);
    }
    po.render_frame(true);
    assert_eq!(pixel(&po, 0, 240), 515);
    assert_eq!(pixel(&po, 8, 240), 512);
}

#[test]
fn monitors_draw_from_separate_palette_halves() {
    let mut po = board();
    po.write(0xD800 + 2 * 64, 0x01);
    po.write(0xF000 + 2 * 128, 0x01);
    po.render_frame(false);
    let (top, bottom) = po.frame().pixels().split_at(256 * 240);
    assert!(top.iter().all(|&p| p < 512));
    assert!(bottom.iter().all(|&p| (512..1024).contains(&p)));
}

#[test]
fn big_sprite_2_flip_mirrors_its_bitmap() {
    let mut po = board();
    po.write(0xE800, 0x01);
    for (reg, value) in [0xC9u8, 0x01, 243, 0x01, 0x01].into_iter().enumerate() {
        po.write(0xDFF8 + reg as u32, value);
    }
    po.render_frame(false);
    // Cell 0 now sits at the right edge of the 128-pixel sprite.
    assert_ne!(pixel(&po, 0, 240), 515);
    assert_eq!(pixel(&po, 120, 240), 515);
    assert_eq!(pixel(&po, 127, 247), 515);
}

#[test]
fn unchanged_video_ram_is_not_redrawn() {
    let mut po = board();
    po.render_frame(false);
    po.write(0xD800, 0x00);
    po.write(0xD801, 0x00);
    assert_eq!(po.query("video.dirty.top"), Some(Value::U32(0)));
    po.write(0xD800, 0x01);
    assert_eq!(po.query("video.dirty.top"), Some(Value::U32(1)));
}

#[test]
fn sound_latches_reach_the_sound_cpu() {
    let mut po = board();
    let latches = po.sound_latches();
    po.io_write(0x02, 0x42);
    po.io_write(0x03, 0x24);
    assert_eq!(latches.sound_cpu_read(0x4016), Some(0x42));
    assert_eq!(latches.sound_cpu_read(0x4017), Some(0x24));

    po.io_write(0x0B, 0x01);
    assert!(latches.sound_cpu_in_reset());
    po.io_write(0x0B, 0x00);
    assert!(!latches.sound_cpu_in_reset());
}

#[test]
fn busy_speech_clears_port_3_bit_4() {
    struct Talking;
    impl SpeechSynth for Talking {
        fn busy(&self) -> bool {
            true
        }
    }
    let mut po = board_with(Variant::PunchOut, Box::new(Talking));
    assert_eq!(po.io_read(0x03).data, 0xEF);
}

#[test]
fn nmi_enable_port() {
    let mut po = board();
    po.io_write(0x08, 0x01);
    assert!(po.nmi_enabled());
    assert_eq!(po.query("nmi_enabled"), Some(Value::Bool(true)));
}

#[test]
fn memory_query_has_no_side_effects() {
    let mut po = board();
    po.write(0xD123, 0x5A);
    assert_eq!(po.query("memory.0xD123"), Some(Value::U8(0x5A)));
    assert_eq!(po.query("memory.nope"), None);
}

#[test]
fn missing_region_names_the_table() {
    let mut roms = roms();
    roms.insert("program", Vec::new());
    let err = PunchOut::new(
        PunchOutConfig::for_variant(Variant::PunchOut),
        &roms,
        Box::new([0u8; 4]),
        Box::new(NullSpeech),
    )
    .err()
    .expect("program ROM is empty");
    assert_eq!(
        err,
        RomError::Undersized {
            table: "program",
            expected: 0xC000,
            actual: 0
        }
    );
    assert!(err.to_string().contains("program"));
}

#[test]
fn arm_wrestling_has_a_wide_big_sprite_1() {
    let po = board_with(Variant::ArmWrestling, Box::new(NullSpeech));
    assert_eq!(po.video().big1().bitmap().width(), 256);
    assert_eq!(po.video().big1().bitmap().height(), 128);
}
