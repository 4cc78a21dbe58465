//! Column-name resolution across vendor export variants.
//!
//! Each canonical field has a priority-ordered alias list. Matching is
//! case-insensitive and ignores surrounding whitespace; the first alias with a
//! matching header wins.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Time,
    Open,
    High,
    Low,
    Close,
    Volume,
    VolumeMa,
    Macd,
    MacdSignal,
    MacdHistogram,
    MaShort,
    MaMid,
    MaLong,
    Kernel,
    BandOuterTop,
    BandOuterBottom,
    Buy,
    Sell,
    StopBuy,
    StopSell,
    Crossover,
}

impl Field {
    pub const ALL: [Field; 21] = [
        Field::Time,
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
        Field::Volume,
        Field::VolumeMa,
        Field::Macd,
        Field::MacdSignal,
        Field::MacdHistogram,
        Field::MaShort,
        Field::MaMid,
        Field::MaLong,
        Field::Kernel,
        Field::BandOuterTop,
        Field::BandOuterBottom,
        Field::Buy,
        Field::Sell,
        Field::StopBuy,
        Field::StopSell,
        Field::Crossover,
    ];

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Time => &["time", "timestamp", "datetime", "date", "t"],
            Field::Open => &["open", "o"],
            Field::High => &["high", "h"],
            Field::Low => &["low", "l"],
            Field::Close => &["close", "c"],
            Field::Volume => &["volume", "vol", "v"],
            Field::VolumeMa => &["volume ma", "volume_ma", "volumema", "vol_ma", "vma"],
            Field::Macd => &["macd"],
            Field::MacdSignal => &["signal line", "signal", "macd_signal", "macd signal"],
            Field::MacdHistogram => &["histogram", "hist", "macd_hist", "macd histogram"],
            Field::MaShort => &["g100", "ma_short", "ma100"],
            Field::MaMid => &["g150", "ma_mid", "ma150"],
            Field::MaLong => &["g200", "ma_long", "ma200"],
            Field::Kernel => &["kernel regression estimate", "kernel_estimate", "kernel"],
            Field::BandOuterTop => &["a5", "band_outer_top", "upper band"],
            Field::BandOuterBottom => &["e5", "band_outer_bottom", "lower band"],
            Field::Buy => &["buy", "buy_signal"],
            Field::Sell => &["sell", "sell_signal"],
            Field::StopBuy => &["stopbuy", "stop buy", "stop_buy"],
            Field::StopSell => &["stopsell", "stop sell", "stop_sell"],
            Field::Crossover => &["cross", "crossover"],
        }
    }
}

/// Index of the header that carries `field`, if any.
pub fn resolve_field<S: AsRef<str>>(headers: &[S], field: Field) -> Option<usize> {
    field.aliases().iter().find_map(|alias| {
        headers
            .iter()
            .position(|h| h.as_ref().trim().eq_ignore_ascii_case(alias))
    })
}

/// Header index per field for a whole header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    indices: Vec<(Field, usize)>,
}

impl ColumnMap {
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Self {
        let indices = Field::ALL
            .into_iter()
            .filter_map(|field| resolve_field(headers, field).map(|i| (field, i)))
            .collect();
        Self { indices }
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        self.indices
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, i)| *i)
    }

    pub fn has(&self, field: Field) -> bool {
        self.get(field).is_some()
    }
}
