/// Separators recognized when a caller passes an already compound symbol.
const SEPARATORS: &[char] = &['-', '_', '/', ':'];

/// How one provider spells a trading pair on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SymbolFormat {
    /// Inserted between base and quote (may be empty).
    pub separator: &'static str,
    /// Prepended to the pair, e.g. `PF_` on Kraken Futures.
    pub prefix: &'static str,
    /// Appended to the pair, e.g. `-SWAP` on OKX.
    pub suffix: &'static str,
    /// Emit the whole symbol in lowercase.
    pub lowercase: bool,
    /// Base-asset renames applied before joining, e.g. `BTC` to `XBT`.
    pub base_aliases: &'static [(&'static str, &'static str)],
    /// Quote-asset renames applied before joining, e.g. `USDT` to `USD`.
    pub quote_aliases: &'static [(&'static str, &'static str)],
}

impl SymbolFormat {
    /// Plain `BASE{sep}QUOTE` with no decoration.
    #[must_use]
    pub const fn joined(separator: &'static str) -> Self {
        Self {
            separator,
            prefix: "",
            suffix: "",
            lowercase: false,
            base_aliases: &[],
            quote_aliases: &[],
        }
    }

    /// Set a prefix.
    #[must_use]
    pub const fn prefix(mut self, prefix: &'static str) -> Self {
        self.prefix = prefix;
        self
    }

    /// Set a suffix.
    #[must_use]
    pub const fn suffix(mut self, suffix: &'static str) -> Self {
        self.suffix = suffix;
        self
    }

    /// Emit lowercase.
    #[must_use]
    pub const fn lowercase(mut self) -> Self {
        self.lowercase = true;
        self
    }

    /// Set base-asset aliases.
    #[must_use]
    pub const fn aliases(mut self, aliases: &'static [(&'static str, &'static str)]) -> Self {
        self.base_aliases = aliases;
        self
    }

    /// Set quote-asset aliases.
    #[must_use]
    pub const fn quote_aliases(mut self, aliases: &'static [(&'static str, &'static str)]) -> Self {
        self.quote_aliases = aliases;
        self
    }
}

/// Split a caller-supplied asset into `(base, quote)`, both uppercased and trimmed.
///
/// `asset` may be a bare base (`"btc"`), a separated pair (`"BTC-USDT"`, `"BTC/USDT"`, also with a
/// trailing decoration such as `"BTC-USDT-SWAP"`) or a concatenated pair (`"BTCUSDT"`). In the
/// first case `quote` supplies the quote leg.
#[must_use]
pub fn split_symbol(asset: &str, quote: &str) -> (String, String) {
    let asset = asset.trim().to_ascii_uppercase();
    let quote = quote.trim().to_ascii_uppercase();

    let mut parts = asset.split(SEPARATORS).filter(|p| !p.is_empty());
    if asset.contains(SEPARATORS) {
        let base = parts.next().unwrap_or_default().to_string();
        let q = parts.next().map_or(quote, str::to_string);
        return (base, q);
    }

    if !quote.is_empty() && asset.len() > quote.len() && asset.ends_with(&quote) {
        let base = asset[..asset.len() - quote.len()].to_string();
        return (base, quote);
    }

    (asset, quote)
}

/// Compound symbol `BASE{sep}QUOTE`, synthesized only when `asset` is not already compound.
///
/// Both `resolve_symbol("BTC-USDT", "USDT", "-")` and `resolve_symbol("BTC", "USDT", "-")` yield
/// `"BTC-USDT"`.
#[must_use]
pub fn resolve_symbol(asset: &str, quote: &str, separator: &str) -> String {
    let (base, quote) = split_symbol(asset, quote);
    if quote.is_empty() {
        return base;
    }
    format!("{base}{separator}{quote}")
}

fn alias(table: &[(&str, &str)], leg: String) -> String {
    table
        .iter()
        .find(|(from, _)| *from == leg)
        .map_or(leg, |(_, to)| (*to).to_string())
}

/// Provider-native symbol for `asset`/`quote` according to `format`.
#[must_use]
pub fn format_symbol(asset: &str, quote: &str, format: &SymbolFormat) -> String {
    let (base, quote) = split_symbol(asset, quote);
    let base = alias(format.base_aliases, base);
    let quote = alias(format.quote_aliases, quote);
    let symbol = format!(
        "{}{base}{}{quote}{}",
        format.prefix, format.separator, format.suffix
    );
    if format.lowercase {
        symbol.to_ascii_lowercase()
    } else {
        symbol
    }
}
