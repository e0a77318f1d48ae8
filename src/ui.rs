use crate::catalog::CatalogProduct;
use crate::models::{CartLine, CartSummary, RenderedCart};

pub fn render_index(catalog: &[CatalogProduct], summary: &CartSummary) -> String {
    let products: String = catalog.iter().map(render_product).collect();
    // Scalars first; user-supplied markup goes in last so it is never rescanned.
    INDEX_HTML
        .replace("{{COUNT}}", &summary.item_count.to_string())
        .replace("{{SUBTOTAL}}", &escape_html(&summary.subtotal.to_string()))
        .replace("{{PRODUCTS}}", &products)
        .replace("{{CART_ITEMS}}", &render_cart_items(&summary.cart))
}

pub fn render_cart_items(cart: &RenderedCart) -> String {
    match cart {
        RenderedCart::Empty => EMPTY_CART_HTML.to_string(),
        RenderedCart::Populated(lines) => lines.iter().map(render_line).collect(),
    }
}

fn render_line(line: &CartLine) -> String {
    let name = escape_html(&line.name);
    let image = if line.image.is_empty() {
        String::new()
    } else {
        format!(r#"<img src="{}" alt="{name}" />"#, escape_html(&line.image))
    };
    format!(
        r#"<div class="cart-item" data-index="{index}">
          {image}
          <div class="cart-item-details">
            <h4>{name}</h4>
            <div class="cart-item-price">{price} &times; {quantity}</div>
            <div class="cart-item-total">{total}</div>
          </div>
          <form method="post" action="/cart/remove/{index}">
            <button class="remove-from-cart" type="submit" aria-label="Remove {name}">&times;</button>
          </form>
        </div>
"#,
        index = line.index,
        price = escape_html(&line.unit_price.to_string()),
        quantity = line.quantity,
        total = escape_html(&line.line_total.to_string()),
    )
}

fn render_product(product: &CatalogProduct) -> String {
    format!(
        r#"<article class="product-card">
        <h3>{name}</h3>
        <p>{description}</p>
        <div class="product-price">{price}</div>
        <form class="add-form" method="post" action="/cart/add">
          <input type="hidden" name="name" value="{name}" />
          <input type="hidden" name="price" value="{price}" />
          <button class="add-to-cart" type="submit">Add to cart</button>
        </form>
      </article>
"#,
        name = escape_html(product.name),
        description = escape_html(product.description),
        price = escape_html(product.price),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(ch),
        }
    }
    out
}

const EMPTY_CART_HTML: &str = r#"<div class="empty-cart">
          <p>Your cart is empty</p>
          <a href="/" class="btn">Shop Now</a>
        </div>
"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Coffee Store</title>
  <style>
    :root {
      --bean: #3b2417;
      --crema: #f4e9dc;
      --roast: #8a5a3b;
      --card: #fffaf4;
      --shadow: 0 18px 40px rgba(59, 36, 23, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--crema);
      color: var(--bean);
      font-family: "Georgia", serif;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: center;
      padding: 20px 32px;
    }

    .cart-count {
      background: var(--roast);
      color: #fff;
      border-radius: 999px;
      padding: 2px 10px;
    }

    main {
      display: grid;
      grid-template-columns: 2fr 1fr;
      gap: 28px;
      padding: 0 32px 48px;
    }

    .products {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 20px;
    }

    .product-card,
    .mini-cart {
      background: var(--card);
      border-radius: 18px;
      box-shadow: var(--shadow);
      padding: 18px;
    }

    .cart-item img {
      width: 100%;
      border-radius: 12px;
    }

    .cart-item {
      display: grid;
      grid-template-columns: 64px 1fr auto;
      gap: 12px;
      align-items: center;
      padding: 10px 0;
    }

    button {
      border: none;
      border-radius: 999px;
      background: var(--bean);
      color: #fff;
      padding: 8px 16px;
      cursor: pointer;
    }

    .notification {
      position: fixed;
      bottom: 20px;
      right: 20px;
      background: var(--bean);
      color: #fff;
      padding: 14px 20px;
      border-radius: 8px;
      opacity: 0;
      transform: translateY(100px);
      transition: transform 0.3s ease, opacity 0.3s ease;
    }

    .notification.visible {
      opacity: 1;
      transform: translateY(0);
    }

    @media (max-width: 760px) {
      main {
        grid-template-columns: 1fr;
      }
    }
  </style>
</head>
<body>
  <header>
    <h1>Coffee Store</h1>
    <span>Cart <span class="cart-count">{{COUNT}}</span></span>
  </header>
  <main>
    <section class="products">
      {{PRODUCTS}}
    </section>
    <aside class="mini-cart" id="mini-cart">
      <h2>Your cart</h2>
      <div class="cart-items">
        {{CART_ITEMS}}
      </div>
      <p>Subtotal <strong class="total-price">{{SUBTOTAL}}</strong></p>
    </aside>
  </main>

  <script>
    const showNotification = (notification) => {
      const toast = document.createElement('div');
      toast.className = 'notification';
      toast.textContent = notification.message;
      document.body.appendChild(toast);
      setTimeout(() => toast.classList.add('visible'), 10);
      setTimeout(() => {
        toast.classList.remove('visible');
        setTimeout(() => toast.remove(), 300);
      }, notification.dismiss_after_ms);
    };

    document.querySelectorAll('form.add-form').forEach((form) => {
      form.addEventListener('submit', async (event) => {
        event.preventDefault();
        const data = new FormData(form);
        const res = await fetch('/api/cart/items', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify(Object.fromEntries(data.entries())),
        });
        if (!res.ok) {
          showNotification({ message: await res.text(), dismiss_after_ms: 3000 });
          return;
        }
        const body = await res.json();
        sessionStorage.setItem('pendingNotification', JSON.stringify(body.notification));
        window.location.reload();
      });
    });

    const pending = sessionStorage.getItem('pendingNotification');
    if (pending) {
      sessionStorage.removeItem('pendingNotification');
      showNotification(JSON.parse(pending));
    }
  </script>
</body>
</html>
"#;
