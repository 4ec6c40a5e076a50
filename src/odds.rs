//! Streak probability read-out

use crate::settings::Language;

/// Everyday comparisons for streaks 1 to 50, as (ja, en)
const EXAMPLES: [(&str, &str); 50] = [
    ("コイントスで狙った面が出る確率 (1/2)", "Flipping a specific face on a coin (1/2)"),
    ("トランプのマークを当てる確率 (1/4)", "Guessing a card suit (1/4)"),
    ("サイコロで大体同じ目が出るくらいの確率 (1/8)", "Guessing a 1-in-8 chance"),
    ("ロシアンルーレットでハズレを引く確率より少し低い (1/16)", "Rolling a specific number on a 16-sided die"),
    ("クラスに同じ誕生日のペアがいる確率の半分 (1/32)", "Guessing a roulette number (1/38)"),
    ("一般的なガチャのPUキャラを単発で引く確率 (約1.5%)", "Getting a critical hit in some RPGs (1.5%)"),
    ("スマホを落として完全に画面が割れる確率くらい (1/128)", "Pulling an SSR in a typical gacha game (~0.7%)"),
    ("麻雀でチートイツをあがる確率 (1/256)", "Getting a rare drop in an MMO (1/256)"),
    ("3桁の暗証番号を1発で当てる確率の半分 (1/512)", "Guessing a 3-digit pin code (1/1000) is close"),
    ("10回連続で信号に引っかからない確率 (1/1024)", "Winning a local raffle (1/1024)"),
    ("街で偶然同姓同名の人に出会う確率 (1/2048)", "Finding a wild shiny in newer games (1/4096) is close"),
    ("四つ葉のクローバーを1発で見つける確率に近い (1/4096)", "Finding a four-leaf clover easily"),
    ("昔のポケモンで色違いに遭遇する確率 (1/8192)", "Finding a shiny Pokémon in older generations (1/8192)"),
    ("アマチュアがゴルフでホールインワンを出す確率 (約1/12000)", "Amateur getting a hole-in-one in golf (~1/12000)"),
    ("飛行機が墜落する確率 (約1/3万)", "Odds of a plane crash (~1/30,000)"),
    ("クイント・フラッシュが出る確率 (約1/6.5万)", "Getting a straight flush (~1/65,000)"),
    ("宝くじで100万円が当たる確率 (1/13万)", "Winning $10,000 in a scratch-off"),
    ("隕石が頭に落ちてくる確率 (約1/25万)", "Hit by a meteorite (~1/250,000)"),
    ("雷に打たれて死ぬ確率 (約1/50万)", "Dying from a lightning strike (~1/500,000)"),
    ("麻雀で天和をあがる確率より少し高い (1/100万)", "Flipping 20 heads in a row (1/1M)"),
    ("カジノのジャックポットを引き当てる確率 (1/200万)", "Hitting a slot machine jackpot (1/2M)"),
    ("一生のうちに全く同じ指紋の人と出会う確率 (1/400万)", "Finding identical fingerprints (1/4M)"),
    ("サメに襲われる確率 (約1/800万)", "Being attacked by a shark (1/8M)"),
    ("ジャンボ宝くじの1等に当選する確率 (1/1000万)より低い", "Winning a major lottery jackpot (>1/10M)"),
    ("大統領になる確率 (約1/3000万)", "Becoming the President (1/30M)"),
    ("宇宙ゴミが直撃する確率 (約1/6000万)", "Hit by space debris (1/60M)"),
    ("自動販売機の下に1万円札が落ちている確率 (約1/1億)", "Finding $100 under a vending machine (1/100M)"),
    ("猿がデタラメに打って「ハムレット」の一節を作る確率", "Monkey typing a Shakespeare line (1/250M)"),
    ("地球に巨大隕石が衝突する確率 (1/5億)", "Earth hit by a massive meteor (1/500M)"),
    ("10億人の中からピンポイントで1人選ばれる確率", "Selected randomly from 1 billion people"),
    ("一生に2回、雷に直撃される確率 (1/20億)", "Struck by lightning twice (1/2B)"),
    ("メガミリオンズで特賞を当てるより難しい (1/42億)", "Winning Mega Millions (1/4.2B)"),
    ("全世界の人間から全く無作為にあなただけが選ばれる確率 (1/80億)以下", "You specifically chosen from all humans (1/8B) is higher"),
    ("世界中全員が同時にくしゃみをする確率", "Everyone on Earth sneezing at once"),
    ("宝くじで1等を2回連続で当てる確率の領域", "Winning the lottery jackpot twice in a row"),
    ("砂漠から特定の砂粒を1つ見つけ出す確率", "Finding a specific grain of sand in a desert"),
    ("ランダムにシャッフルしたトランプが新品と同じ並びになる確率(の一部)", "A perfectly sorted deck from random shuffle (part of it)"),
    ("ゴルフでホールインワンを連続で3回出す確率", "Three hole-in-ones in a row in golf"),
    ("同じ隕石が2回、同じ人の頭に落ちる確率", "Same meteor hitting the same person twice"),
    ("地球上のすべてのアリの中から特定の1匹を見つけ出す確率", "Finding one specific ant out of all ants on Earth"),
    ("宇宙空間のデブリが数万km離れた別のデブリに偶然衝突する確率", "Space debris colliding purely by chance"),
    ("地球上のすべての人間が同じ瞬間に瞬きをするレベル", "Everyone on Earth blinking at the same exact millisecond"),
    ("全人類の指紋が偶然一致するレベルの奇跡", "All humans having the exact same fingerprint by chance"),
    ("ジャンボ宝くじで1等を4回連続で当てるような奇跡", "Winning the lottery jackpot four times in a row"),
    ("歴史上のすべての出来事が全く同じ順序で別次元で起こる確率", "All historical events happening identically in a parallel universe"),
    ("海の水を全部ティースプーンですくう労力に匹敵する確率", "Emptying the ocean with a teaspoon"),
    ("ランダムなキーボード入力でWindowsのOSを丸ごと書き上げる確率", "Typing an entire OS perfectly by smashing the keyboard"),
    ("太陽系外から飛んできた小惑星が地球のリンゴに直撃する確率", "Interstellar asteroid hitting exactly one apple on Earth"),
    ("宇宙の全原子の中から特定のものを引き当てるような奇跡", "Picking a specific atom from the entire universe"),
    ("神がサイコロを振ることすら放棄する確率", "A probability so low even God stops rolling dice"),
];

/// Anything past the table
const BEYOND: (&str, &str) = (
    "人間の理解を超えた、天文学的な奇跡の領域",
    "An astronomical miracle beyond human comprehension",
);

/// How unlikely the current streak is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakOdds {
    /// `0.5^n` as a percentage, e.g. `"3.13"`
    pub percent: String,
    /// e.g. `"1 / 1,024"`
    pub fraction: String,
    /// Something about as likely, in the player's language
    pub example: &'static str,
}

/// Odds of a streak of `streak` fair tosses. `None` for no streak.
pub fn streak_odds(streak: u32, lang: Language) -> Option<StreakOdds> {
    if streak == 0 {
        return None;
    }
    let exponent = i32::try_from(streak).unwrap_or(i32::MAX);
    let probability = 0.5f64.powi(exponent);
    // Long streaks get more decimals so the number doesn't collapse to 0.00
    let decimals = if streak >= 10 { 4 } else { 2 };
    // Halves round up (3.125 -> 3.13), unlike the formatter's ties-to-even
    let scale = 10f64.powi(decimals as i32);
    let percent = (probability * 100.0 * scale).round() / scale;
    Some(StreakOdds {
        percent: format!("{:.*}", decimals, percent),
        fraction: format!("1 / {}", group_thousands(2f64.powi(exponent))),
        example: example(streak, lang),
    })
}

fn example(streak: u32, lang: Language) -> &'static str {
    let (ja, en) = usize::try_from(streak)
        .ok()
        .and_then(|n| EXAMPLES.get(n.checked_sub(1)?))
        .copied()
        .unwrap_or(BEYOND);
    match lang {
        Language::Ja => ja,
        Language::En => en,
    }
}

/// Integer rendering of `value` with comma separators
fn group_thousands(value: f64) -> String {
    if !value.is_finite() {
        return "∞".to_string();
    }
    let digits = format!("{value:.0}");
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_streak() {
        assert_eq!(streak_odds(0, Language::En), None);
    }

    #[test]
    fn test_short_streaks() {
        let one = streak_odds(1, Language::En).unwrap();
        assert_eq!(one.percent, "50.00");
        assert_eq!(one.fraction, "1 / 2");

        let five = streak_odds(5, Language::En).unwrap();
        assert_eq!(five.percent, "3.13");
        assert_eq!(five.fraction, "1 / 32");
    }

    #[test]
    fn test_long_streaks_use_four_decimals() {
        let ten = streak_odds(10, Language::En).unwrap();
        assert_eq!(ten.percent, "0.0977");
        assert_eq!(ten.fraction, "1 / 1,024");

        let twenty = streak_odds(20, Language::En).unwrap();
        assert_eq!(twenty.percent, "0.0001");
        assert_eq!(twenty.fraction, "1 / 1,048,576");
    }

    #[test]
    fn test_examples_follow_language() {
        let one = streak_odds(1, Language::En).unwrap();
        assert_eq!(one.example, "Flipping a specific face on a coin (1/2)");
        let one = streak_odds(1, Language::Ja).unwrap();
        assert_eq!(one.example, "コイントスで狙った面が出る確率 (1/2)");

        let fifty = streak_odds(50, Language::En).unwrap();
        assert_eq!(fifty.example, "A probability so low even God stops rolling dice");
        assert_eq!(
            streak_odds(50, Language::Ja).unwrap().example,
            "神がサイコロを振ることすら放棄する確率"
        );
    }

    #[test]
    fn test_examples_past_the_table() {
        for streak in [51, 64, 1000] {
            assert_eq!(streak_odds(streak, Language::En).unwrap().example, BEYOND.1);
            assert_eq!(streak_odds(streak, Language::Ja).unwrap().example, BEYOND.0);
        }
    }

    #[test]
    fn test_grouping() {
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(123456789.0), "123,456,789");
        assert_eq!(group_thousands(f64::INFINITY), "∞");
    }
}
