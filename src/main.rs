use anyhow::Result;
use std::io::{self, Write};

use finger_gesture::config::Config;
use finger_gesture::event::{FingerEvent, GestureEvent, OutboundEvent, WalkDirection};
use finger_gesture::hand::HandFrame;
use finger_gesture::sink::OscSink;

const CONFIG_PATH: &str = "config.toml";

fn parse_direction(s: &str) -> Option<WalkDirection> {
    match s {
        "front" => Some(WalkDirection::Front),
        "left" => Some(WalkDirection::Left),
        "right" => Some(WalkDirection::Right),
        _ => None,
    }
}

/// 全ランドマークが画面中央にある手
fn centered_hand(label: &str, width: u32, height: u32) -> Result<HandFrame> {
    let points = [[0.5, 0.5, 0.0]; 21];
    HandFrame::from_normalized(label, &points, width, height)
}

fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH);

    println!("=== Finger Gesture - Sink Test ===");
    println!("接続先: {}", config.sink.addr);
    println!();
    println!("コマンド:");
    println!("  g x y angle   - Gun を送信 (例: g 320 200 120)");
    println!("  s x y angle   - Shoot を送信 (例: s 320 200 45)");
    println!("  w dir cadence - Walking を送信 (例: w front 125)");
    println!("  i             - idle を送信");
    println!("  f left|right  - 指のテレメトリを送信");
    println!("  t             - テスト送信 (Gun を少しずつ動かす)");
    println!("  q             - 終了");
    println!();

    let sink = OscSink::new(&config.sink)?;

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let parts: Vec<&str> = input.split_whitespace().collect();

        if parts.is_empty() {
            continue;
        }

        let event = match parts[0] {
            "g" | "s" if parts.len() == 4 => {
                let x: i32 = parts[1].parse()?;
                let y: i32 = parts[2].parse()?;
                let angle: i32 = parts[3].parse()?;
                if parts[0] == "g" {
                    GestureEvent::gun([x, y], angle)
                } else {
                    GestureEvent::shoot([x, y], angle)
                }
            }
            "w" if parts.len() == 3 => {
                let Some(direction) = parse_direction(parts[1]) else {
                    println!("方向は front / left / right");
                    continue;
                };
                let cadence: u32 = parts[2].parse()?;
                GestureEvent::walking(direction, cadence)
            }
            "i" => GestureEvent::idle(),
            "f" if parts.len() == 2 => {
                let hand = centered_hand(parts[1], config.app.width, config.app.height)?;
                let ev = OutboundEvent::Finger(FingerEvent::from_hand(&hand));
                sink.try_send(&ev)?;
                println!("送信しました: {}", hand.handedness.as_str());
                continue;
            }
            "t" => {
                println!("テスト送信中...");
                for i in 0..10 {
                    let x = 100 + i * 40;
                    sink.try_send(&OutboundEvent::Gesture(GestureEvent::gun([x, 200], 120)))?;
                    println!("  x = {}", x);
                    std::thread::sleep(std::time::Duration::from_millis(500));
                }
                println!("テスト完了");
                continue;
            }
            "q" => {
                println!("終了します");
                break;
            }
            _ => {
                println!("不明なコマンド: {}", parts[0]);
                continue;
            }
        };

        let fields: Vec<String> = event
            .fields()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        sink.try_send(&OutboundEvent::Gesture(event))?;
        println!("送信しました: {}", fields.join(" "));
    }

    Ok(())
}
